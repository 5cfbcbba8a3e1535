pub mod codes;
pub mod qr;

pub use codes::{generate_confirmation_code, generate_pickup_code, is_valid_code_format};
pub use qr::{decode_qr_payload, encode_qr_payload, QrPayload};
