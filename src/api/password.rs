/// Hash `password` the way the vendor's login endpoint expects it.
///
/// This is the lowercase hex MD5 digest with every `0` at an even position replaced by `c`.
/// It is a wire format, not a security measure.
pub fn hash_password(password: &str) -> String {
    let digest = md5::compute(password.as_bytes());

    format!("{:x}", digest)
        .chars()
        .enumerate()
        .map(|(i, c)| if i % 2 == 0 && c == '0' { 'c' } else { c })
        .collect()
}
