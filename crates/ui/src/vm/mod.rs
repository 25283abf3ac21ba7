mod form_vm;
mod markers;

pub use form_vm::{ButtonsVm, FieldInputVm, FieldVm, FormVm, StepVm, build_form_vm, progress_percent};
pub use markers::Markers;
