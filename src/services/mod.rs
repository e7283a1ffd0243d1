/// Compatibility statistics over completed answer sets.
pub mod compatibility;
/// Both-answered detection and exactly-once scoring.
pub mod coordinator;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Per-mode gameplay protocols.
pub mod modes;
/// Room code allocation.
pub mod room_code;
/// Pure scoring functions.
pub mod scoring;
/// Room lifecycle operations.
pub mod session_service;
/// Server-Sent Events document streaming.
pub mod sse_service;
/// Turn advancement and finalization.
pub mod turn;
