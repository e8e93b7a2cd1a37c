mod push;
mod status;

pub mod dtos {
    pub use crate::push::dtos::*;
}

pub use crate::push::api::*;
pub use crate::status::api::*;
