//! Cross-crate tests for `netroute`. Nothing in here is part of the public API.

#[cfg(test)]
mod support;

#[cfg(test)]
mod interfaces {
    mod integration;
}

#[cfg(test)]
mod orchestration {
    mod integration;
}

#[cfg(test)]
mod settings {
    mod integration;
}
