//! Fixed conversational texts shared by the relay and the session manager.

/// Opening assistant turn of every fresh conversation.
pub const GREETING: &str = "Give/Explain the symtoms you are having:-";

/// Scope instruction sent with every completion request and stored as the sole
/// turn after a history clear.
pub const SYSTEM_INSTRUCTION: &str = "\
You are a helpful assistant specialized in analyzing symptoms and providing basic recommendations. \
Please only answer questions related to health symptoms, their causes, and possible solutions. \
Do not answer unrelated queries.If you are asked questions about ny other topic please refrane from answer them";

/// Reply content when the endpoint answered without usable content.
pub const NO_RESPONSE_FALLBACK: &str = "No response generated. Please try again.";

/// Reply content when the endpoint could not be reached or rejected the call.
pub const CONNECTION_FALLBACK: &str =
    "Sorry, I couldn't connect to the API. Please try again later.";
