pub mod flow_manager;

pub use flow_manager::{FlowManager, ServiceResult};
