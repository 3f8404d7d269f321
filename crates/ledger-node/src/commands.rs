//! The operator REPL's command grammar.
//!
//! Deliberately hand-rolled rather than built on the CLI-argument crate:
//! this is a tiny, line-oriented, stateful surface read from stdin while
//! the process is already running, not a one-shot argument vector.

/// One parsed operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `failProcess` / `fail` — mark this peer dead.
    Fail,
    /// `fixProcess` / `fix` — revive this peer and start recovery.
    Fix,
    /// `printBlockchain` / `blocks` — dump the local chain.
    PrintBlockchain,
    /// `printBalance` / `bal` — dump the local balance table.
    PrintBalance,
    /// `moneyTransfer(from,to,amount)` / `mt(...)` — propose a transfer.
    MoneyTransfer { from: u8, to: u8, amount: u64 },
    /// `debugMessage(to,text)` / `debug(...)` — send a DEBUG probe.
    DebugMessage { to: u8, text: String },
    /// Anything that didn't match the grammar above.
    Unknown,
}

/// Parse one line of operator input.
pub fn parse_line(line: &str) -> Command {
    let line = line.trim();
    if let Some(rest) = strip_call(line, &["moneyTransfer", "mt"]) {
        return parse_money_transfer(rest).unwrap_or(Command::Unknown);
    }
    if let Some(rest) = strip_call(line, &["debugMessage", "debug"]) {
        return parse_debug_message(rest).unwrap_or(Command::Unknown);
    }
    match line {
        "failProcess" | "fail" => Command::Fail,
        "fixProcess" | "fix" => Command::Fix,
        "printBlockchain" | "blocks" => Command::PrintBlockchain,
        "printBalance" | "bal" => Command::PrintBalance,
        _ => Command::Unknown,
    }
}

/// If `line` is `name(...)` for one of `names`, return the text between
/// the parentheses.
fn strip_call<'a>(line: &'a str, names: &[&str]) -> Option<&'a str> {
    for name in names {
        if let Some(rest) = line.strip_prefix(name) {
            let rest = rest.trim_start();
            if let Some(inner) = rest.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
                return Some(inner);
            }
        }
    }
    None
}

fn parse_money_transfer(args: &str) -> Option<Command> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    let [from, to, amount] = parts[..] else { return None };
    Some(Command::MoneyTransfer {
        from: from.parse().ok()?,
        to: to.parse().ok()?,
        amount: amount.parse().ok()?,
    })
}

fn parse_debug_message(args: &str) -> Option<Command> {
    let (to, text) = args.split_once(',')?;
    Some(Command::DebugMessage {
        to: to.trim().parse().ok()?,
        text: text.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_fail_and_its_alias() {
        assert_eq!(parse_line("failProcess"), Command::Fail);
        assert_eq!(parse_line("fail"), Command::Fail);
    }

    #[test]
    fn recognizes_fix_and_its_alias() {
        assert_eq!(parse_line("fixProcess"), Command::Fix);
        assert_eq!(parse_line("fix"), Command::Fix);
    }

    #[test]
    fn recognizes_print_commands_and_aliases() {
        assert_eq!(parse_line("printBlockchain"), Command::PrintBlockchain);
        assert_eq!(parse_line("blocks"), Command::PrintBlockchain);
        assert_eq!(parse_line("printBalance"), Command::PrintBalance);
        assert_eq!(parse_line("bal"), Command::PrintBalance);
    }

    #[test]
    fn parses_money_transfer_and_its_alias() {
        let expected = Command::MoneyTransfer { from: 1, to: 2, amount: 30 };
        assert_eq!(parse_line("moneyTransfer(1,2,30)"), expected);
        assert_eq!(parse_line("mt(1, 2, 30)"), expected);
    }

    #[test]
    fn parses_debug_message_with_text_containing_commas() {
        let cmd = parse_line("debugMessage(3, hello, world)");
        assert_eq!(
            cmd,
            Command::DebugMessage { to: 3, text: "hello, world".to_string() }
        );
    }

    #[test]
    fn malformed_calls_and_unrecognized_input_are_unknown() {
        assert_eq!(parse_line("moneyTransfer(1,2)"), Command::Unknown);
        assert_eq!(parse_line("moneyTransfer(a,2,30)"), Command::Unknown);
        assert_eq!(parse_line("frobnicate"), Command::Unknown);
        assert_eq!(parse_line(""), Command::Unknown);
    }
}
