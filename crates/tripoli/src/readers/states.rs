// State annotation file reader.

use std::io::BufRead;

use tripoli_core::{StateInfo, StateTag, Symbol};

use super::ReadError;

/// Read one [`StateInfo`] per non-blank line: `<id> <tag> [<sym> [<sym>]]`.
///
/// Tag 0 (trigram) takes two symbols, tag 1 (bigram) one symbol, which goes
/// in the second slot. Tags 2 to 4 take none. The leading id is checked to be
/// an integer but otherwise ignored; annotations are returned in file order.
pub fn read_states<R: BufRead>(reader: R) -> Result<Vec<StateInfo>, ReadError> {
    let mut states = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let nline = idx + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        states.push(parse_state_line(&fields, nline)?);
    }
    Ok(states)
}

fn parse_state_line(fields: &[&str], line: usize) -> Result<StateInfo, ReadError> {
    let number = |i: usize, what: &str| -> Result<i32, ReadError> {
        let field = fields
            .get(i)
            .ok_or_else(|| ReadError::parse(line, format!("missing {what}")))?;
        field
            .parse()
            .map_err(|_| ReadError::parse(line, format!("invalid {what} '{field}'")))
    };

    number(0, "state id")?;
    let tag = StateTag::try_from(number(1, "state tag")?)
        .map_err(|e| ReadError::parse(line, e.to_string()))?;

    let (info, used) = match tag {
        StateTag::Trigram => {
            let fst: Symbol = number(2, "first context symbol")?;
            let snd: Symbol = number(3, "second context symbol")?;
            (StateInfo::trigram(fst, snd), 4)
        }
        StateTag::Bigram => (StateInfo::bigram(number(2, "context symbol")?), 3),
        other => (StateInfo::bare(other), 2),
    };
    if fields.len() > used {
        return Err(ReadError::parse(
            line,
            format!("{tag:?} state takes {} fields, got {}", used, fields.len()),
        ));
    }
    Ok(info)
}
