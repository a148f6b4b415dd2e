use crate::constants::MEM_SIZE;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgramError {
    #[error("line {line}: {token:?} is not a binary byte")]
    Malformed { line: usize, token: String },

    #[error("program is {0} bytes, memory only holds {}", MEM_SIZE)]
    TooLarge(usize),
}

// One byte per line, written in binary. Anything after a '#' is a comment, and
// lines left empty are skipped.
pub fn parse_program(src: &str) -> Result<Vec<u8>, ProgramError> {
    let mut bin = vec![];
    for (i, line) in src.lines().enumerate() {
        let token = line.split('#').next().unwrap_or_default().trim();
        if token.is_empty() {
            continue;
        }
        bin.push(parse_byte(token).ok_or_else(|| ProgramError::Malformed {
            line: i + 1,
            token: token.to_owned(),
        })?);
    }

    if bin.len() > MEM_SIZE {
        return Err(ProgramError::TooLarge(bin.len()));
    }
    Ok(bin)
}

fn parse_byte(token: &str) -> Option<u8> {
    // from_str_radix alone would also take a leading '+'.
    if !token.bytes().all(|b| b == b'0' || b == b'1') {
        return None;
    }
    u8::from_str_radix(token, 2).ok()
}
