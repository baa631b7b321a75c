pub(crate) mod error;
pub(crate) mod my_profile;
