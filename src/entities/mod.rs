pub mod inventory_record;
pub mod order;
pub mod promotion;
pub mod quotation;
pub mod vehicle;
