use chrono::Utc;
use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 4;

/// New report id: base-36 epoch milliseconds followed by four random base-36
/// characters. No registry of issued ids is kept.
pub fn new_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let mut id = to_base36(millis);
    let mut rng = rand::thread_rng();
    for _ in 0..SUFFIX_LEN {
        id.push(BASE36[rng.gen_range(0..BASE36.len())] as char);
    }
    id
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
