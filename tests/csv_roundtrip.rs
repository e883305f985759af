mod common;

use common::{raster_dir, text_params, write_grid};
use crustal_coregister::coregister::run_coregister;
use crustal_coregister::points::PointTable;

#[test]
fn test_csv_in_csv_out_keeps_passengers_and_sorts() {
    let (_tmp, dir) = raster_dir();
    write_grid(&dir, 10.0, (-5.0, 5.0), (-5.0, 5.0), 1.0, |_, _| 40_000.0);
    write_grid(&dir, 25.0, (-5.0, 5.0), (-5.0, 5.0), 1.0, |_, _| 30_000.0);

    let input = dir.join("points.csv");
    std::fs::write(
        &input,
        "label,age (Ma),lon,lat,deposit\n\
         2,25,0.0,0.0,copper\n\
         1,25,1.0,1.0,gold\n\
         2,10,0.5,0.5,\"zinc, lead\"\n\
         1,10,40.0,40.0,tin\n",
    )
    .unwrap();

    let joined = run_coregister(input.as_str(), &dir, &text_params(3.0)).unwrap();
    let output = dir.join("joined.csv");
    joined.to_csv_path(&output).unwrap();

    let table = PointTable::from_csv_path(&output).unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(
        &table.headers()[..5],
        ["label", "age (Ma)", "lon", "lat", "deposit"]
    );
    assert_eq!(table.headers().len(), 12);

    let rows: Vec<Vec<&str>> = table
        .records()
        .iter()
        .map(|r| r.fields.iter().map(String::as_str).collect())
        .collect();
    assert_eq!(&rows[0][..5], ["1", "10", "40.0", "40.0", "tin"]);
    assert_eq!(&rows[0][5..], ["", "", "", "", "", "0", ""]);
    assert_eq!(&rows[1][..5], ["1", "25", "1.0", "1.0", "gold"]);
    assert_eq!(rows[1][5], "30000");
    assert_eq!(&rows[2][..5], ["2", "10", "0.5", "0.5", "zinc, lead"]);
    assert_eq!(rows[2][5], "40000");
    assert_eq!(&rows[3][..5], ["2", "25", "0.0", "0.0", "copper"]);
}
