mod form;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use form::{FormPage, MultistepFormView};
pub use state::ViewError;
