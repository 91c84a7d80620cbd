// Route handlers. Every handler returns ApiResult, so failures leave through
// ApiError's IntoResponse and always carry the `{ ok: false }` envelope.
pub mod health;
pub mod members;
