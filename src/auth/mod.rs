pub mod oauth;

pub use oauth::{
    authorize_url, complete_authorization, generate_state, result_page, CallbackParams,
    CallbackResult, ERROR_TAG, SUCCESS_TAG,
};
