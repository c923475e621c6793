pub mod debug_route;
