pub mod resource;
pub mod use_case;
pub mod validation;
