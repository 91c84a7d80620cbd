pub mod edit_key;
pub mod response;

pub use edit_key::{authorize, EditKey, EDIT_KEY_HEADER};
pub use response::{ApiResponse, ApiResult};
