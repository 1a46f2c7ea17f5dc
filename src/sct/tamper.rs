/// Complements every bit of the last signature byte. Applying it twice
/// restores the signature.
pub fn tamper_signature(signature: &mut [u8]) {
    if let Some(last) = signature.last_mut() {
        *last = !*last;
    }
}
