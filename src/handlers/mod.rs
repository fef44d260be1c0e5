pub mod object_handlers;
