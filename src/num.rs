/// Format number in Rust style: `1_000_000`, zero padded to at least 9 digits.
pub(crate) fn format_pad9_u64(n: u64) -> String {
    // separate each 3 digit with a '_'
    let x = format!("{:09}", n);
    let len = x.len();
    x.chars().enumerate().fold(String::new(), |mut acc, (i, c)| {
        if i > 0 && (len - i) % 3 == 0 {
            acc.push('_');
        }
        acc.push(c);
        acc
    })
}
