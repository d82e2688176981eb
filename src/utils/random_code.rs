use rand::Rng;
use rand::seq::SliceRandom;

const PASSWORD_UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const PASSWORD_LOWER: &[u8] = b"abcdefghijkmnpqrstuvwxyz";
const PASSWORD_DIGITS: &[u8] = b"23456789";
const PASSWORD_SPECIAL: &[u8] = b"!@#$%^&*";

/// 生成学号：`S` + 年份 + 4 位随机数
pub fn generate_student_code(year: i32) -> String {
    let mut rng = rand::rng();
    format!("S{year:04}{:04}", rng.random_range(0..10_000))
}

/// 生成满足密码策略的随机密码
pub fn generate_random_password(len: usize) -> String {
    let len = len.max(8);
    let mut rng = rand::rng();
    let pools = [PASSWORD_UPPER, PASSWORD_LOWER, PASSWORD_DIGITS, PASSWORD_SPECIAL];

    // 每类字符至少一个
    let mut chars: Vec<u8> = pools
        .iter()
        .map(|pool| pool[rng.random_range(0..pool.len())])
        .collect();
    while chars.len() < len {
        let pool = pools[rng.random_range(0..pools.len())];
        chars.push(pool[rng.random_range(0..pool.len())]);
    }
    chars.shuffle(&mut rng);
    String::from_utf8(chars).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validate::{is_valid_student_code, validate_password};

    #[test]
    fn test_student_code_format() {
        for _ in 0..50 {
            let code = generate_student_code(2025);
            assert!(code.starts_with("S2025"));
            assert!(is_valid_student_code(&code), "{code}");
        }
    }

    #[test]
    fn test_random_password_meets_policy() {
        for _ in 0..50 {
            let pwd = generate_random_password(16);
            assert_eq!(pwd.len(), 16);
            assert!(validate_password(&pwd).is_valid, "{pwd}");
        }
    }

    #[test]
    fn test_random_password_uses_known_charset() {
        let allowed: Vec<u8> = [PASSWORD_UPPER, PASSWORD_LOWER, PASSWORD_DIGITS, PASSWORD_SPECIAL]
            .concat();
        let pwd = generate_random_password(32);
        assert!(pwd.bytes().all(|b| allowed.contains(&b)), "{pwd}");
        // 打乱后前四位不再固定为 大写/小写/数字/符号 的顺序
        let fixed_prefix = (0..20).all(|_| {
            let p = generate_random_password(8).into_bytes();
            PASSWORD_UPPER.contains(&p[0])
                && PASSWORD_LOWER.contains(&p[1])
                && PASSWORD_DIGITS.contains(&p[2])
                && PASSWORD_SPECIAL.contains(&p[3])
        });
        assert!(!fixed_prefix);
    }

    #[test]
    fn test_random_password_minimum_length() {
        assert_eq!(generate_random_password(3).len(), 8);
    }
}
