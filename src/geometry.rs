/// ゼロ除算を防ぐ微小値
const EPSILON: f32 = 1e-6;

/// 頂点 p2 における角度を計算（度数）
///
/// p2 から p1、p2 から p3 へ伸びる2本の線分のなす角。
/// 常に 0〜180 度の範囲に収まる。
pub fn angle_at_vertex(p1: (f32, f32), p2: (f32, f32), p3: (f32, f32)) -> f32 {
    let v1 = (p1.0 - p2.0, p1.1 - p2.1);
    let v2 = (p3.0 - p2.0, p3.1 - p2.1);
    angle_between_vectors(v1, v2)
}

/// 2つの2Dベクトルのなす角を計算（度数）
///
/// cos = dot / (|v1| * |v2| + eps)
/// ゼロベクトルを含む縮退入力でもエラーにせず定義された値を返す。
/// 符号なしの角度なので回転方向は区別できない。
pub fn angle_between_vectors(v1: (f32, f32), v2: (f32, f32)) -> f32 {
    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let norm1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let norm2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    let cos = (dot / (norm1 * norm2 + EPSILON)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}
