pub type Endpoint = str;

pub const LOGIN: &Endpoint = "/newTwoLoginAPI.do";
pub const PLANT: &Endpoint = "/newTwoPlantAPI.do";

/* `op` selecting the device list of a plant on `PLANT` */
pub const OP_DEVICE_LIST: &str = "getAllDeviceListTwo";

/* Pagination is mandatory on `PLANT` even though only the first inverter is read */
pub const PAGE_NUM: u32 = 1;
pub const PAGE_SIZE: u32 = 1;
