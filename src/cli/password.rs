//! `password` command: digests to paste into `[site.users]`.

use crate::utils::password::PasswordDigest;

/// `<password> ==> <digest>` for one password.
pub fn digest_line(password: &str) -> String {
    format!("{password} ==> {}", PasswordDigest::generate(password))
}

pub fn print_digests(passwords: &[String]) {
    for password in passwords {
        println!("{}", digest_line(password));
    }
}
