use crate::error::DecodeError;
use crate::models::Log;

/// keccak256("Transfer(address,address,uint256)"), shared by ERC-20 and ERC-721
pub const TRANSFER_EVENT_SIGNATURE: &str = "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

const WORD_HEX_LEN: usize = 64;
const ADDRESS_HEX_LEN: usize = 40;

/// `Transfer(address indexed from, address indexed to, uint256 value)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Erc20Transfer {
    pub token: String,
    pub from: String,
    pub to: String,
    pub value: String,
}

/// `Transfer(address indexed from, address indexed to, uint256 indexed tokenId)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Erc721Transfer {
    pub token: String,
    pub from: String,
    pub to: String,
    pub token_id: String,
}

/// Decode a log as an ERC-20 Transfer. The amount lives in the first data word.
pub fn decode_erc20_transfer(log: &Log) -> Result<Erc20Transfer, DecodeError> {
    check_signature(log)?;
    require_topics(log, 3)?;

    let from = address_from_word(&topic_word(&log.topics[1])?)?;
    let to = address_from_word(&topic_word(&log.topics[2])?)?;
    let value = first_data_word(&log.data)?;

    Ok(Erc20Transfer {
        token: normalize_hex(&log.address),
        from,
        to,
        value: format!("0x{}", value),
    })
}

/// Decode a log as an ERC-721 Transfer. All three arguments are indexed, so
/// the token id is the fourth topic and the data field is not read.
pub fn decode_erc721_transfer(log: &Log) -> Result<Erc721Transfer, DecodeError> {
    check_signature(log)?;
    require_topics(log, 4)?;

    let from = address_from_word(&topic_word(&log.topics[1])?)?;
    let to = address_from_word(&topic_word(&log.topics[2])?)?;
    let token_id = topic_word(&log.topics[3])?;

    Ok(Erc721Transfer {
        token: normalize_hex(&log.address),
        from,
        to,
        token_id: format!("0x{}", token_id),
    })
}

/// Lowercase a hex string and make sure it carries a single `0x` prefix
pub fn normalize_hex(value: &str) -> String {
    format!("0x{}", strip_hex_prefix(value.trim()).to_lowercase())
}

fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

fn check_signature(log: &Log) -> Result<(), DecodeError> {
    let topic = log.topics.first().ok_or(DecodeError::MissingTopics {
        expected: 1,
        got: 0,
    })?;

    if !topic.trim().eq_ignore_ascii_case(TRANSFER_EVENT_SIGNATURE) {
        return Err(DecodeError::SignatureMismatch(topic.clone()));
    }
    Ok(())
}

fn require_topics(log: &Log, expected: usize) -> Result<(), DecodeError> {
    if log.topics.len() < expected {
        return Err(DecodeError::MissingTopics {
            expected,
            got: log.topics.len(),
        });
    }
    Ok(())
}

/// A topic as 64 lowercase hex characters without prefix
fn topic_word(topic: &str) -> Result<String, DecodeError> {
    let word = strip_hex_prefix(topic.trim());

    if word.len() != WORD_HEX_LEN || !word.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DecodeError::InvalidWord(topic.to_string()));
    }
    Ok(word.to_lowercase())
}

/// The address sits in the low 20 bytes; the high 12 bytes must be zero
fn address_from_word(word: &str) -> Result<String, DecodeError> {
    let (padding, address) = word.split_at(WORD_HEX_LEN - ADDRESS_HEX_LEN);

    if padding.chars().any(|c| c != '0') {
        return Err(DecodeError::InvalidAddress(format!("0x{}", word)));
    }
    Ok(format!("0x{}", address))
}

fn first_data_word(data: &str) -> Result<String, DecodeError> {
    let data_hex = strip_hex_prefix(data.trim());

    if data_hex.len() % 2 != 0 || !data_hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DecodeError::InvalidWord(data.to_string()));
    }
    if data_hex.len() < WORD_HEX_LEN {
        return Err(DecodeError::InsufficientData {
            expected: WORD_HEX_LEN / 2,
            got: data_hex.len() / 2,
        });
    }
    Ok(data_hex[..WORD_HEX_LEN].to_lowercase())
}
