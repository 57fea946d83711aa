pub mod address;
pub mod address_list;
pub mod connection;
pub mod counter;
