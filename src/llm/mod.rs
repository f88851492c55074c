//! LLM domain: intent detection, prompts, completion gateway, reply parsing.
//!
//! Public API for the reply half of the wingman.
//! External code should only use the items exported here.
//!
//!   - intent.rs:  SUGGEST_REPLY vs GIVE_ADVICE
//!   - prompts.rs: fixed templates + transcript serialization
//!   - gateway.rs: OpenAI-compatible chat completion over HTTP
//!   - parse.rs:   completion text → ReplyOutcome
//!   - provider.rs: provider metadata + API key lookup

pub mod gateway;
pub mod intent;
pub mod parse;
pub mod prompts;
pub mod provider;
pub mod types;

pub use gateway::{CompletionGateway, GatewayConfig, GatewayError, OpenRouterGateway};
pub use intent::{detect_mode, joined_text};
pub use parse::parse_reply;
pub use prompts::{build_prompt, expected_direction, Prompt};
pub use types::{
    Direction, InboundMessage, Message, Mode, Placeholder, ReplyOutcome, ReplyResult, RizzRequest,
    RizzResponse, Side,
};
