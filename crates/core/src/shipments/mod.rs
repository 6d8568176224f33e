//! Shipments module - turning stockpiled quantities into physical shipments.

mod shipments_model;
mod shipments_service;
mod shipments_traits;

pub use shipments_model::{
    NewShipment, NewShipmentItem, Shipment, ShipmentItem, ShipmentItemRequest, ShipmentRequest,
    ShipmentStatus,
};
pub use shipments_service::ShipmentService;
pub use shipments_traits::{ShipmentRepositoryTrait, ShipmentServiceTrait};
