// 領域層：資料模型與介面，不做 I/O

pub mod model;
pub mod ports;
