pub mod domain;
pub mod ports;
pub mod session;

pub use domain::{
    ConversationMessage, DocumentStatus, FileSource, GenerationState, IncomingFile, Role,
    Summary, UploadedDocument,
};
pub use ports::{
    DocumentReader, PortError, PortResult, QuestionAnsweringService, SummaryGenerationService,
};
pub use session::{
    AnswerRequest, Removal, SessionError, SessionPhase, SessionState, SummaryRequest,
    DOCUMENT_SEPARATOR,
};
