mod descriptor;
mod schema_builder;
