pub mod forward_euler;
