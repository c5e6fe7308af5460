//! Tests for respack embed module

use respack::{
    embed, id_header, ResourceBall, ResourceDeclaration, ResourceDefinition, ResourceObject,
    ResourcePack, StorageClass,
};

fn ball() -> ResourceBall {
    ResourceBall::new(
        vec![
            ResourceObject::new(
                ResourceDefinition::new("raw", "IMAGE_LOGO", "logo.bin").with_alias("LOGO"),
                vec![0xAA; 4],
            ),
            ResourceObject::new(
                ResourceDefinition::new("raw", "boot-splash", "boot.bin")
                    .with_storage(StorageClass::LinkEmbedded),
                (0u8..20).collect(),
            ),
            ResourceObject::new(
                ResourceDefinition::new("raw", "FONT_FALLBACK", "font.bin")
                    .with_storage(StorageClass::LinkEmbedded),
                vec![0x01],
            ),
            ResourceObject::new(
                ResourceDefinition::new("raw", "DEFERRED", "d.bin")
                    .with_storage(StorageClass::FilesystemDeferred),
                vec![0x02],
            ),
        ],
        vec![ResourceDeclaration::new("raw", "LANG_PACK")],
    )
    .unwrap()
}

#[test]
fn test_embed_selects_builtins_in_order() {
    let source = embed(&ball());

    assert!(!source.contains("image_logo"));
    assert!(!source.contains("deferred"));

    let boot = source
        .find("static const uint8_t s_boot_splash[] __attribute__((aligned(8)))")
        .unwrap();
    let font = source.find("static const uint8_t s_font_fallback[]").unwrap();
    assert!(boot < font);

    assert!(source.contains("{ RESOURCE_ID_BOOT_SPLASH, s_boot_splash, 20 },"));
    assert!(source.contains("{ RESOURCE_ID_FONT_FALLBACK, s_font_fallback, 1 },"));
    assert!(source.contains("const uint32_t g_num_builtin_resources = 2;"));
}

#[test]
fn test_embed_byte_lines() {
    let source = embed(&ball());
    assert!(source.contains(
        "  0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,\n  0x10, 0x11, 0x12, 0x13,\n};"
    ));
}

#[test]
fn test_embed_empty_table() {
    let source = embed(&ResourceBall::default());
    assert!(source.contains("g_num_builtin_resources = 0;"));
}

#[test]
fn test_id_header() {
    let header = id_header(&ball());

    assert!(header.contains("RESOURCE_ID_IMAGE_LOGO = 1,"));
    assert!(header.contains("RESOURCE_ID_LOGO = 1,"));
    assert!(header.contains("RESOURCE_ID_BOOT_SPLASH = 2,"));
    assert!(header.contains("RESOURCE_ID_DEFERRED = 4,"));
    assert!(header.contains("RESOURCE_ID_LANG_PACK = 5,"));
    assert!(header.contains("NUM_RESOURCES = 5,"));
}

#[test]
fn test_header_ids_match_pack_for_mixed_storage() {
    let ball = ResourceBall::new(
        vec![
            ResourceObject::new(
                ResourceDefinition::new("raw", "FONT", "font.bin")
                    .with_storage(StorageClass::LinkEmbedded),
                b"font-bytes".to_vec(),
            ),
            ResourceObject::new(
                ResourceDefinition::new("raw", "LOGO", "logo.bin"),
                b"logo-bytes".to_vec(),
            ),
        ],
        Vec::new(),
    )
    .unwrap();

    let header = id_header(&ball);
    assert!(header.contains("RESOURCE_ID_LOGO = 1,"));
    assert!(header.contains("RESOURCE_ID_FONT = 2,"));

    let pack = ResourcePack::from_ball(&ball, None).unwrap();
    let logo_id = ball.id_of("LOGO").unwrap();
    assert_eq!(pack.resource(logo_id), Some(&b"logo-bytes"[..]));
    assert_eq!(pack.resource(ball.id_of("FONT").unwrap()), None);

    assert!(embed(&ball).contains("{ RESOURCE_ID_FONT, s_font, 10 },"));
}
