//! Identity adapter integration tests
//!
//! [`yspotify::identity::SpotifyClient`] runs against a small axum server on a loopback port
//! that answers like the Spotify endpoints it uses.

mod fake_spotify;
mod spotify_client;
