pub(crate) mod presentation;
pub(crate) mod sign_session;
