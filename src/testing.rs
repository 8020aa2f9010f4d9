/// Create an owned byte payload
#[allow(dead_code)]
pub(crate) fn bb(x: impl AsRef<[u8]>) -> Vec<u8> {
    x.as_ref().to_vec()
}
