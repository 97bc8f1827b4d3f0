pub mod html;
pub mod validation;
