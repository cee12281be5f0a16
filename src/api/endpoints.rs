//! REST 端点路径，与后端路由保持一致

// 拼车帖子
pub const CARPOOLS: &str = "/api/carpools";
pub const ALL_CARPOOLS: &str = "/api/carpools/getall";
pub const MY_POSTS: &str = "/api/carpools/user/me";

// 过滤查询
pub const NEED_CAR_CARPOOLS: &str = "/api/carpools/type/needCar";
pub const NEED_PEOPLE_CARPOOLS: &str = "/api/carpools/type/needPeople";
pub const TODAY_CARPOOLS: &str = "/api/carpools/today";
pub const THIS_WEEK_CARPOOLS: &str = "/api/carpools/thisweek";
pub const SEARCH_CARPOOLS: &str = "/api/carpools/search";

// 用户
pub const LOGIN: &str = "/api/users/login";
pub const REFRESH_TOKEN: &str = "/api/users/refresh-token";
pub const USER_STATS: &str = "/api/users/stats";
