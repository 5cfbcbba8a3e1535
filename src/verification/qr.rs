use serde::{Deserialize, Serialize};

const QR_PREFIX: &str = "DELIVERY";
const QR_DELIMITER: char = '-';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrPayload {
    pub delivery_id: String,
    pub code: String,
}

/// Builds `DELIVERY-{delivery_id}-{code}`.
///
/// `delivery_id` must not contain `-`, otherwise the payload no longer
/// splits into three segments and [`decode_qr_payload`] rejects it.
pub fn encode_qr_payload(delivery_id: &str, code: &str) -> String {
    format!("{QR_PREFIX}{QR_DELIMITER}{delivery_id}{QR_DELIMITER}{code}")
}

/// Splits a payload back into its id and code; `None` unless it is exactly
/// three `-` separated segments starting with `DELIVERY`.
pub fn decode_qr_payload(payload: &str) -> Option<QrPayload> {
    let segments: Vec<&str> = payload.split(QR_DELIMITER).collect();

    match segments.as_slice() {
        [prefix, delivery_id, code] if *prefix == QR_PREFIX => Some(QrPayload {
            delivery_id: (*delivery_id).to_string(),
            code: (*code).to_string(),
        }),
        _ => None,
    }
}
