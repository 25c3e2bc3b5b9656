pub mod api;
pub mod attraction_page;
pub mod booking;
pub mod destination;
pub mod discount;
pub mod order;
pub mod stop_sale;
pub mod tour;
