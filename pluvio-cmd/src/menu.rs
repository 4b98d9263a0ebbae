//! Numeric menu prompts shared by the interactive commands.
//!
//! Every prompt keeps asking until it reads a number it accepts; an empty
//! line or end of input falls back to the default.

use std::io::{BufRead, Write};

/// Asks until the answer is one of `allowed`.
///
/// # Arguments
///
/// * `input` - where answers are read from, one per line
/// * `output` - where the prompt and complaints are written
/// * `message` - prompt printed before each attempt
/// * `allowed` - the set of acceptable answers
/// * `default` - returned on an empty line or end of input
pub fn prompt_from_set<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
    allowed: &[u32],
    default: u32,
) -> std::io::Result<u32> {
    prompt_filtered(input, output, message, default, |answer| {
        allowed.contains(&answer)
    })
}

/// Asks until the answer falls inside `low..=high`.
pub fn prompt_in_range<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
    low: u32,
    high: u32,
    default: u32,
) -> std::io::Result<u32> {
    prompt_filtered(input, output, message, default, |answer| {
        (low..=high).contains(&answer)
    })
}

fn prompt_filtered<R, W, F>(
    input: &mut R,
    output: &mut W,
    message: &str,
    default: u32,
    accept: F,
) -> std::io::Result<u32>
where
    R: BufRead,
    W: Write,
    F: Fn(u32) -> bool,
{
    loop {
        write!(output, "{message}")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(default);
        }
        let answer = line.trim();
        if answer.is_empty() {
            return Ok(default);
        }
        match answer.parse::<u32>() {
            Ok(value) if accept(value) => return Ok(value),
            Ok(_) => writeln!(output, "Answer outside the allowed options!")?,
            Err(_) => writeln!(output, "Wrong answer format!")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn accepts_an_allowed_answer() {
        let mut input = Cursor::new("2\n");
        let mut output = Vec::new();
        let answer =
            prompt_from_set(&mut input, &mut output, "Chosen option: ", &[1, 2, 9], 9).unwrap();
        assert_eq!(answer, 2);
        let transcript = String::from_utf8(output).unwrap();
        assert_eq!(transcript.matches("Chosen option: ").count(), 1);
    }

    #[test]
    fn empty_line_falls_back_to_default() {
        let mut input = Cursor::new("\n");
        let mut output = Vec::new();
        let answer =
            prompt_from_set(&mut input, &mut output, "Chosen option: ", &[1, 2, 9], 9).unwrap();
        assert_eq!(answer, 9);
    }

    #[test]
    fn end_of_input_falls_back_to_default() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        let answer =
            prompt_from_set(&mut input, &mut output, "Chosen option: ", &[1, 2, 9], 9).unwrap();
        assert_eq!(answer, 9);
    }

    #[test]
    fn reprompts_until_a_valid_answer() {
        let mut input = Cursor::new("mapa\n7\n2\n");
        let mut output = Vec::new();
        let answer =
            prompt_from_set(&mut input, &mut output, "Chosen option: ", &[1, 2, 9], 9).unwrap();
        assert_eq!(answer, 2);
        let transcript = String::from_utf8(output).unwrap();
        assert_eq!(transcript.matches("Chosen option: ").count(), 3);
        assert!(transcript.contains("Wrong answer format!"));
        assert!(transcript.contains("Answer outside the allowed options!"));
    }

    #[test]
    fn negative_numbers_are_a_format_error() {
        let mut input = Cursor::new("-1\n9\n");
        let mut output = Vec::new();
        let answer =
            prompt_from_set(&mut input, &mut output, "Chosen option: ", &[1, 2, 9], 9).unwrap();
        assert_eq!(answer, 9);
        let transcript = String::from_utf8(output).unwrap();
        assert!(transcript.contains("Wrong answer format!"));
    }

    #[test]
    fn range_prompt_rejects_answers_outside_the_bounds() {
        let mut input = Cursor::new("31\n0\n14\n");
        let mut output = Vec::new();
        let answer =
            prompt_in_range(&mut input, &mut output, "Day: ", 1, 30, 14).unwrap();
        assert_eq!(answer, 14);
        let transcript = String::from_utf8(output).unwrap();
        assert_eq!(
            transcript.matches("Answer outside the allowed options!").count(),
            2
        );
    }
}
