#![allow(warnings)]
//! TDAH Companheiro Frontend Entry Point

mod app;
mod backend;
mod components;
mod context;
mod models;
mod pages;
mod store;
mod theme;
mod toast;

use app::App;
use leptos::prelude::*;
use log::LevelFilter;

fn main() {
    console_error_panic_hook::set_once();
    if let Err(e) = rolling_logger::init_logger(500, "TDAH Companheiro", LevelFilter::Debug) {
        web_sys::console::error_1(&format!("[APP] Logger setup failed: {}", e).into());
    }
    mount_to_body(App);
}
