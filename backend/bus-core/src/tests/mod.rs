mod auth;
mod command;
mod cookie_store;
mod logger;
mod mechanism;
