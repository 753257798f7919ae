#[cfg(unix)]
mod helpers;

mod auth {
    #[cfg(unix)]
    mod handshake;
}

mod error {
    mod location;
}

mod marshal {
    mod round_trip;
}
