pub mod cors;
pub mod form_payload;
pub mod response_envelope;
