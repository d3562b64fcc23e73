use crate::envelope::EventEnvelope;
use crate::error::DecodeError;

/// Decode a feedback request body into an [`EventEnvelope`].
///
/// A body that is empty or only whitespace is reported as
/// [`DecodeError::EmptyBody`]; anything else that fails to parse is
/// [`DecodeError::Json`] carrying the parser's diagnostic.
pub fn decode(body: &[u8]) -> Result<EventEnvelope, DecodeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::EmptyBody);
    }

    let envelope = serde_json::from_slice(body)?;
    Ok(envelope)
}
