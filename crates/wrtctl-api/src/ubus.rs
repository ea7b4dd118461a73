// ubus RPC bridge
//
// Builds `ubus call <path> <method> '<json>'` lines, runs them through the
// checked command channel, and decodes the printed JSON. Shell quoting for
// every caller-supplied value lives here so the wire contract is built in
// exactly one place.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::Error;
use crate::session::Session;

/// Decoded result of a successful ubus call.
#[derive(Debug, Clone, PartialEq)]
pub enum UbusReply {
    /// The call exited 0 and printed nothing.
    Empty,
    /// The call printed a JSON document.
    Json(Value),
}

impl UbusReply {
    /// The JSON payload, if any.
    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Empty => None,
            Self::Json(value) => Some(value),
        }
    }

    /// The payload as a `Value`, with `Empty` mapped to `true`.
    pub fn into_value(self) -> Value {
        self.into_json().unwrap_or(Value::Bool(true))
    }
}

/// Wrap `arg` in single quotes for a POSIX shell.
///
/// Embedded single quotes become `'\''`. Nothing else needs escaping
/// inside single quotes, so any byte sequence survives unchanged.
pub fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Pass `arg` through bare when it is made only of characters the shell
/// treats literally, otherwise quote it.
pub fn shell_word(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '/' | '@' | ':' | '+'));
    if plain { arg.to_string() } else { shell_quote(arg) }
}

/// Build the shell line for one ubus call.
pub fn ubus_command(path: &str, method: &str, args: &Map<String, Value>) -> Result<String, Error> {
    let message = serde_json::to_string(args).map_err(|e| Error::Encode(e.to_string()))?;
    Ok(format!(
        "ubus call {} {} {}",
        shell_word(path),
        shell_word(method),
        shell_quote(&message)
    ))
}

/// Decode the framed stdout of a successful ubus call.
pub fn decode_reply(output: &str) -> Result<UbusReply, Error> {
    if output.trim().is_empty() {
        return Ok(UbusReply::Empty);
    }
    serde_json::from_str(output)
        .map(UbusReply::Json)
        .map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: output.to_string(),
        })
}

impl Session {
    /// Call a method on the device's ubus.
    ///
    /// Non-zero exit status, transport failure, and undecodable output are
    /// all errors; an empty reply is [`UbusReply::Empty`].
    pub async fn ubus(
        &mut self,
        path: &str,
        method: &str,
        args: &Map<String, Value>,
    ) -> Result<UbusReply, Error> {
        let command = ubus_command(path, method, args)?;
        debug!(path, method, "ubus call");

        let output = self.send_checked(&command).await?;
        match output.exit_code {
            Some(0) => decode_reply(&output.stdout),
            code => Err(Error::Ubus {
                path: path.to_string(),
                method: method.to_string(),
                exit_code: code.unwrap_or(-1),
                output: output.stdout,
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    /// Undo POSIX single-quoting for one word, as `sh` would.
    fn unquote(word: &str) -> String {
        let mut out = String::new();
        let mut quoted = false;
        let mut chars = word.chars();
        while let Some(c) = chars.next() {
            match (c, quoted) {
                ('\'', _) => quoted = !quoted,
                ('\\', false) => out.extend(chars.next()),
                (c, _) => out.push(c),
            }
        }
        assert!(!quoted, "unterminated quote in {word}");
        out
    }

    #[test]
    fn quote_round_trips_awkward_text() {
        for raw in ["plain", "it's", "''", "a b\tc", "$HOME `id` \"x\"", "héllo wörld ✓", ""] {
            assert_eq!(unquote(&shell_quote(raw)), raw);
        }
    }

    #[test]
    fn shell_word_leaves_safe_tokens_bare() {
        assert_eq!(shell_word("network.interface.lan"), "network.interface.lan");
        assert_eq!(shell_word("wan 6"), "'wan 6'");
        assert_eq!(shell_word(""), "''");
    }

    #[test]
    fn builds_call_with_empty_args() {
        let cmd = ubus_command("system", "info", &Map::new()).unwrap();
        assert_eq!(cmd, "ubus call system info '{}'");
    }

    #[test]
    fn json_args_survive_quoting() {
        let args = json!({ "name": "it's \"eth0\"", "note": "naïve ✓" });
        let map = args.as_object().unwrap().clone();
        let cmd = ubus_command("network.device", "status", &map).unwrap();

        let word = cmd.strip_prefix("ubus call network.device status ").unwrap();
        let decoded: Value = serde_json::from_str(&unquote(word)).unwrap();
        assert_eq!(decoded, args);
    }

    #[test]
    fn decodes_replies() {
        assert_eq!(decode_reply("").unwrap(), UbusReply::Empty);
        assert_eq!(decode_reply("  \n").unwrap(), UbusReply::Empty);
        assert_eq!(
            decode_reply("{\"a\":1}").unwrap(),
            UbusReply::Json(json!({ "a": 1 }))
        );
        assert!(matches!(
            decode_reply("{\"a\":"),
            Err(Error::Deserialization { .. })
        ));
    }
}
