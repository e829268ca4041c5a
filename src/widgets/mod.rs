pub mod field;
pub mod modal;
pub mod toast;

pub use field::FieldView;
pub use modal::InfoDialog;
pub use toast::{Toast, ToastKind, ToastManager, ToastWidget};
