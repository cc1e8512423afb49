pub const PET_PHOTOS_BUCKET: &str = "pet-photos";
pub const PET_PHOTO_FILE_NAME: &str = "main.jpg";
pub const SIGNED_URL_TTL_SECS: i64 = 60 * 60;
/// Cached signed urls are dropped this long before they really expire
pub const SIGNED_URL_EXPIRY_MARGIN_SECS: i64 = 60;
pub const SESSION_REFRESH_MARGIN_SECS: i64 = 60;

pub const PIC_PET_MAX_SIZE_BYTES: usize = 6_000_000;
pub const ACCEPTED_IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpeg", "jpg", "heic"];

pub const PETS_TABLE: &str = "pets";
pub const TAGS_TABLE: &str = "tags";
pub const PUBLIC_LOOKUP_RPC: &str = "get_pet_public_by_tag";

pub const PET_LIST_COLUMNS: &str = "id,name,species,breed,is_lost,photo_url";
pub const PET_DETAIL_COLUMNS: &str = "id,name,species,breed,is_lost,photo_url,color,birth_year,\
birth_date,sex,weight_kg,owner_phone,owner_whatsapp,public_notes,allergies,medications,\
conditions,vet_name,vet_phone,extra_info,extra_contacts";
pub const TAG_COLUMNS: &str = "id,code,pet_id,status";

pub const SPECIES_OPTIONS: [&str; 2] = ["Perro", "Gato"];

pub const MIN_BIRTH_YEAR: i32 = 1990;
/// Upper bound accepted by the profile editor for a typed birth year
pub const MAX_PROFILE_BIRTH_YEAR: i32 = 2035;
pub const MAX_WEIGHT_KG: f64 = 120.0;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_PET_TEXT_LEN: usize = 2;
pub const TAG_CODE_MIN_LEN: usize = 3;
pub const TAG_CODE_MAX_LEN: usize = 50;

pub const BIRTH_DATE_DISPLAY_FORMAT: &str = "%d/%m/%Y";
pub const EMPTY_FIELD_PLACEHOLDER: &str = "—";
